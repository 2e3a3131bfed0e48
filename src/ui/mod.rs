pub mod charts;
pub mod layout;
pub mod pages;
pub mod panels;
pub mod table;
