pub mod place_lookup;
