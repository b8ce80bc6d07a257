pub mod buffbar;
