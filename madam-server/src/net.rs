pub mod http;
pub mod output;
pub mod sink;
pub mod telnet;
