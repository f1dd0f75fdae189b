pub(crate) mod optimistic_lock;
