/*
 * Responsibility
 * - the middleware surface of the crate
 * - bearer_auth and access_gate carry the per-request security pipeline;
 *   cors and http are transport concerns
 */
pub mod access_gate;
pub mod bearer_auth;
pub mod cors;
pub mod http;
