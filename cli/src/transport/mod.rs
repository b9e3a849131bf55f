/**
 * Transports which can reach a device, the Transport and Connector traits
 * themselves live in the model so tasks can be written against them
 */
pub mod ssh;
