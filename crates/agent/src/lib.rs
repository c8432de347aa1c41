//! Intent analysis against Gemini.
//!
//! The crate is layered bottom-up:
//! - `llm` defines the `TextGenerator` seam and the `generateContent` reply shape
//! - `gemini` implements that seam over REST (Vertex AI or the Gemini API)
//! - `prompt` and `extract` build the instruction prompt and pull the JSON
//!   object back out of free-form model text
//! - `gateway` ties them together into a `ModelGateway` returning raw codes
//! - `service` maps those codes onto the closed `Priority`/`EmotionalTone`
//!   enums and attaches processing metrics
//!
//! The model only classifies. It never sees anything beyond the request text,
//! domain and prior conversation messages.

pub mod extract;
pub mod gateway;
pub mod gemini;
pub mod llm;
pub mod prompt;
pub mod service;
