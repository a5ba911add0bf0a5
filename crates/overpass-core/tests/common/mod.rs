pub mod overpass_server;
