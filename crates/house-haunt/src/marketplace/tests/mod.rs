mod common;

mod discovery;
mod notifications;
mod reviews;
