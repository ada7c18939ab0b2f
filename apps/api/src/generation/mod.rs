// Generation gateway.
// Forwards text and image generation to the PromptLens backend. Nothing here
// generates content locally: a failed backend call is an error, never a
// placeholder.

pub mod handlers;
