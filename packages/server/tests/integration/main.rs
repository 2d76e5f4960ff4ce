mod auth;
mod claim;
