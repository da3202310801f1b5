pub mod apply;
pub mod catalog;
pub mod company;
pub mod interaction;
pub mod recruitment;
pub mod resume;
pub mod user;
