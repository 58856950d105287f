pub mod body_limit;

pub use body_limit::reject_oversized_body;
