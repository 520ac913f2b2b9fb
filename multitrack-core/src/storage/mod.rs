pub mod track_store;
