pub mod activities;
pub mod announcements;
pub mod auth;
pub mod canteen;
pub mod children;
pub mod liaison;
pub mod report_cards;
pub mod schools;
pub mod timetables;
pub mod users;
