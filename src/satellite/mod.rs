pub mod propagation;
pub mod state;
