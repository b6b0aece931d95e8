pub mod card;
pub mod rank;
pub mod shoe;
pub mod suit;
