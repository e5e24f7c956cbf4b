pub mod keyboard_diagram;
pub mod level_select;
pub mod progress_bar;
pub mod result_overlay;
pub mod stats_sidebar;
pub mod typing_area;
