#![cfg(test)]

mod discovery;
mod dispatch;
mod utils;
