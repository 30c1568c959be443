pub mod dump;
pub mod wialon;
