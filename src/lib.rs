// Crowd steering driven by a dense field of procedurally placed markers.
// Each tick every marker pulls on its nearest agent; agents smooth the summed
// pull into a velocity and walk toward a shared goal.

pub mod engine;
