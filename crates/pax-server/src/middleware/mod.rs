pub mod attribution;
pub mod onboarding;

pub use attribution::AttributionCapture;
pub use onboarding::OnboardingGate;
