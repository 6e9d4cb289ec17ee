pub mod batch;
pub mod history;
pub mod phone;
pub mod row;
pub mod validation;
