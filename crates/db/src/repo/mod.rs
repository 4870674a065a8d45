pub mod playstate;
