use cuddleberry_model::config::{parse_address, Settings};
use cuddleberry_model::{Error, Profile, Result};
use std::io::{BufRead, Write};
use std::net::Ipv4Addr;

/**
 * Prompt asks the operator questions, one line per answer
 */
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "\n{}", message).map_err(|e| Error::io("failed to write prompt", e))
    }

    /**
     * Ask a question, returning the trimmed answer or `default` when the
     * answer is empty
     */
    pub fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        let written = match default {
            Some(default) => write!(self.output, "\n{} ({}):\n> ", question, default),
            None => write!(self.output, "\n{}:\n> ", question),
        };
        written
            .and_then(|_| self.output.flush())
            .map_err(|e| Error::io("failed to write prompt", e))?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| Error::io("failed to read answer", e))?;

        let answer = line.trim();
        if answer.is_empty() {
            return match default {
                Some(default) => Ok(default.to_string()),
                None if read == 0 => Err(Error::Config(format!("no answer to `{}`", question))),
                None => Ok(String::new()),
            };
        }
        Ok(answer.to_string())
    }

    /**
     * Ask a yes/no question, only `y` counts as yes
     */
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let default = if default { "y" } else { "n" };
        let answer = self.ask(question, Some(default))?;
        Ok(answer.eq_ignore_ascii_case("y"))
    }
}

/**
 * What was given on the command line, anything missing is asked for unless
 * running in batch mode
 */
#[derive(Clone, Debug, Default)]
pub struct ProfileArgs {
    pub target: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub nfs: bool,
    pub batch: bool,
}

/**
 * Collect the Profile for this run.
 *
 * `discover` is only called when no target was given, its answer becomes the
 * default for the target question.
 */
pub fn collect_profile<R, W, D>(
    prompt: &mut Prompt<R, W>,
    settings: &Settings,
    args: ProfileArgs,
    discover: D,
) -> Result<Profile>
where
    R: BufRead,
    W: Write,
    D: FnOnce() -> Ipv4Addr,
{
    let defaults = &settings.defaults;
    let batch = args.batch;

    let hostname_prefix = match args.prefix {
        Some(prefix) => prefix,
        None if batch => defaults.hostname_prefix.clone(),
        None => prompt.ask(
            "Enter a hostname prefix, first host will be 'prefix0'",
            Some(&defaults.hostname_prefix),
        )?,
    };

    let password_suffix = match args.suffix {
        Some(suffix) => suffix,
        None if batch => defaults.password_suffix.clone(),
        None => prompt.ask(
            "Enter a password suffix, passwords will be 'hostnamesuffix'",
            Some(&defaults.password_suffix),
        )?,
    };

    let share_nfs = if args.nfs || batch {
        args.nfs || defaults.share_nfs
    } else {
        prompt.confirm("Share NFS? y/n", defaults.share_nfs)?
    };

    let address = match args.target {
        Some(target) => parse_address(&target)?,
        None if batch => discover(),
        None => {
            let discovered = discover().to_string();
            parse_address(&prompt.ask("Enter target ip", Some(&discovered))?)?
        }
    };

    Ok(Profile {
        address,
        hostname_prefix,
        password_suffix,
        share_nfs,
    })
}
