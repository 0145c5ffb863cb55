pub(crate) mod cache;
pub(crate) mod hit;
pub(crate) mod poster;
