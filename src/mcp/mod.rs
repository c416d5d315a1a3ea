// JSON-RPC tool server: wire types, the request dispatcher and the stdio loop
pub mod handler;
pub mod protocol;
pub mod stdio;
