pub mod spush;
