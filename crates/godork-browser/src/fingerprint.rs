use chromiumoxide::browser::BrowserConfigBuilder;
use rand::seq::SliceRandom;

const DESKTOP_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

const VIEWPORTS: &[(u32, u32)] = &[(1920, 1080), (1366, 768), (1536, 864), (1440, 900)];

/// Window size, user agent and locale presented by the solver's browser.
///
/// Drawn fresh for every solve so consecutive challenges do not share a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintConfig {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub language: String,
}

impl FingerprintConfig {
    #[must_use]
    pub fn randomized() -> Self {
        let mut rng = rand::thread_rng();
        let user_agent = DESKTOP_AGENTS.choose(&mut rng).copied().unwrap_or(DESKTOP_AGENTS[0]);
        let (width, height) = VIEWPORTS.choose(&mut rng).copied().unwrap_or(VIEWPORTS[0]);

        Self {
            user_agent: user_agent.to_string(),
            viewport_width: width,
            viewport_height: height,
            language: "en-US".to_string(),
        }
    }

    /// Chromium switches carrying this fingerprint.
    #[must_use]
    pub fn launch_args(&self) -> Vec<String> {
        vec![
            format!("--user-agent={}", self.user_agent),
            format!("--lang={}", self.language),
        ]
    }

    /// Apply window size and switches to a launch configuration.
    #[must_use]
    pub fn configure(&self, builder: BrowserConfigBuilder) -> BrowserConfigBuilder {
        self.launch_args()
            .into_iter()
            .fold(builder, |builder, arg| builder.arg(arg))
            .window_size(self.viewport_width, self.viewport_height)
    }
}
