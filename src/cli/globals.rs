use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub url: String,
    pub flow: String,
    pub query: Option<String>,
    pub answers: Vec<(String, SecretString)>,
    pub non_interactive: bool,
    pub retry: Option<u32>,
    pub timeout: u64,
    pub insecure: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(url: String, flow: String) -> Self {
        Self {
            url,
            flow,
            query: None,
            answers: Vec::new(),
            non_interactive: false,
            retry: None,
            timeout: 30,
            insecure: false,
        }
    }

    pub fn add_answer(&mut self, key: String, value: SecretString) {
        self.answers.push((key, value));
    }
}
