pub mod calendar;
pub mod department;
pub mod html;
pub mod pagination;
pub mod time;
pub mod validation;
