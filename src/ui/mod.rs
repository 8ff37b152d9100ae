pub mod loading;
pub mod theme;
