#[path = "transport/outbound_http.rs"]
mod outbound_http;
#[path = "transport/snapshot_socket.rs"]
mod snapshot_socket;
#[path = "support/snapshot_server.rs"]
mod snapshot_server;
