mod helpers;
mod room;
