//! CSS selectors for the PhotoWallet UI
//!
//! The app marks interactive elements with `data-testid` attributes and
//! accessible controls with `aria-label`, so the checks never depend on
//! styling classes.

/// Main page heading
pub const HEADING: &str = "h1";

/// Any interactive button
pub const BUTTON: &str = "button";

/// First-run welcome dismissal
pub const GET_STARTED_BUTTON: &str = r#"[data-testid="button-get-started"]"#;

/// Placeholder shown when the wallet holds no photos
pub const EMPTY_STATE: &str = r#"[data-testid="container-empty-state"]"#;

/// Photo grid container
pub const PHOTO_GRID: &str = r#"[data-testid="grid-photos"]"#;

/// Individual photo cards inside the grid
pub const PHOTO_CARD: &str = r#"[data-testid="card-photo"]"#;

/// Full-size image inside the photo viewer
pub const VIEWER_IMAGE: &str = r#"[data-testid="img-viewer-photo"]"#;

/// Viewer navigation arrows
pub const PREVIOUS_ARROW: &str = r#"[aria-label="Previous photo"]"#;
pub const NEXT_ARROW: &str = r#"[aria-label="Next photo"]"#;

/// Header control that leaves the viewer
pub const BACK_BUTTON: &str = r#"[data-testid="button-back"]"#;

/// Settings entry point
pub const SETTINGS_BUTTON: &str = r#"[data-testid="button-settings"]"#;

/// Any open modal dialog
pub const DIALOG: &str = r#"[role="dialog"]"#;
