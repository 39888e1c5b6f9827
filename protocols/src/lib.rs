//! Wire formats spoken by SCPI instruments over a raw socket.

pub mod block;
pub mod scpi;
