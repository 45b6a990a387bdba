mod dispatch;
mod utils;
mod views;
