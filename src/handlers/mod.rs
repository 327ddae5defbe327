pub mod ads;
pub mod auth;
pub mod comments;
pub mod likes;
pub mod messages;
pub mod posts;
pub mod tags;
pub mod users;
