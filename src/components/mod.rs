pub mod controls;
pub mod flow_chart;
pub mod sidebar;
