pub mod amount;
pub mod field;
pub mod flow;
pub mod form;
pub mod guard;
pub mod jetton;
pub mod notification;
pub mod services;
