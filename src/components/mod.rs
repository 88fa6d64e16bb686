pub mod keyed_map;
