pub mod connectivity;
pub mod local_store;
pub mod remote_gateway;
