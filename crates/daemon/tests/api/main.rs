mod click;
mod helpers;
mod stream;
