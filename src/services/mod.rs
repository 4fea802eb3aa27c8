// RedBlue services
// Services provide persistence, strength classification, identity and export.

pub mod export_service;
pub mod identity;
pub mod password_strength;
pub mod persistence;
