//! esp-link command codes
//!
//! Must match the table in the esp-link firmware. The transport codes
//! (MQTT, REST, web, socket) are opaque to this core and forwarded
//! verbatim.

/// Synchronize; starts the protocol
pub const CMD_SYNC: u16 = 1;
/// Response carrying a value
pub const CMD_RESP_V: u16 = 2;
/// Response addressed to a registered callback
pub const CMD_RESP_CB: u16 = 3;
/// Get the wifi status
pub const CMD_WIFI_STATUS: u16 = 4;
/// Add a custom callback
pub const CMD_CB_ADD: u16 = 5;
pub const CMD_CB_EVENTS: u16 = 6;
/// Get current time in seconds since the unix epoch
pub const CMD_GET_TIME: u16 = 7;

/// Register MQTT callback functions
pub const CMD_MQTT_SETUP: u16 = 10;
/// Publish an MQTT topic
pub const CMD_MQTT_PUBLISH: u16 = 11;
/// Subscribe to an MQTT topic
pub const CMD_MQTT_SUBSCRIBE: u16 = 12;
/// Define the MQTT last will
pub const CMD_MQTT_LWT: u16 = 13;

/// Set up a REST connection
pub const CMD_REST_SETUP: u16 = 20;
/// Make a request to a REST server
pub const CMD_REST_REQUEST: u16 = 21;
/// Define an HTML header
pub const CMD_REST_SETHEADER: u16 = 22;

/// Web-server setup
pub const CMD_WEB_SETUP: u16 = 30;
/// Publish web-server data
pub const CMD_WEB_DATA: u16 = 31;

/// Set up a socket connection
pub const CMD_SOCKET_SETUP: u16 = 40;
/// Send a socket packet
pub const CMD_SOCKET_SEND: u16 = 41;
