use std::str::FromStr;

/// Parse `"a,b"`, as used for grid sizes on the command line
pub fn parse_pair<T: FromStr>(s: &str) -> Result<(T, T), String>
where
    <T as FromStr>::Err: std::fmt::Display,
{
    let v = parse_list(s, 2)?;
    Ok((parse(v[0])?, parse(v[1])?))
}

/// Parse `"a,b,c"`, as used for sinogram shapes on the command line
pub fn parse_triplet<T: FromStr>(s: &str) -> Result<(T, T, T), String>
where
    <T as FromStr>::Err: std::fmt::Display,
{
    let v = parse_list(s, 3)?;
    Ok((parse(v[0])?, parse(v[1])?, parse(v[2])?))
}

fn parse_list(s: &str, n: usize) -> Result<Vec<&str>, String> {
    let v: Vec<_> = s.split(',').map(str::trim).collect();
    if v.len() == n { Ok(v) }
    else            { Err(format!("expected {n} comma-separated values, found {}: `{s}`", v.len())) }
}

fn parse<T: FromStr>(s: &str) -> Result<T, String>
where
    <T as FromStr>::Err: std::fmt::Display,
{
    s.parse().map_err(|e| format!("`{s}`: {e}"))
}

/// Group numeric digits to facilitate reading long numbers
pub fn group_digits<F: std::fmt::Display>(n: F) -> String {
    use numsep::{separate, Locale};
    separate(n, Locale::English)
}


pub mod timing {

    use super::group_digits;
    use std::time::Instant;
    use tracing::info;

    /// Logs how long each phase of a program took.
    pub struct Progress {
        previous: Instant,
        phase: String,
    }

    impl Progress {

        #[allow(clippy::new_without_default)]
        pub fn new() -> Self { Self { previous: Instant::now(), phase: "startup".into() } }

        /// Log the start of a phase, and start its timer.
        pub fn start(&mut self, message: &str) {
            info!("{message} ...");
            message.clone_into(&mut self.phase);
            self.start_timer();
        }

        /// Log the time elapsed since the last `start` or `done`
        pub fn done(&mut self) {
            info!("{} done: {} ms", self.phase, group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        /// Log message followed by time elapsed since last start or done
        pub fn done_with_message(&mut self, message: &str) {
            info!("{message}: {} ms", group_digits(self.previous.elapsed().as_millis()));
            self.start_timer();
        }

        fn start_timer(&mut self) { self.previous = Instant::now() }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

    #[rstest(/**/ n, expected,
             case(        12,          "12"),
             case(      1234,       "1,234"),
             case(1234567890, "1,234,567,890"),
    )]
    fn digits_are_grouped(n: u64, expected: &str) {
        assert_eq!(group_digits(n), expected);
    }

    #[test]
    fn pairs_and_triplets() {
        assert_eq!(parse_pair::<usize>("128,64"), Ok((128, 64)));
        assert_eq!(parse_pair::<f32>(" 1.5 , 2 "), Ok((1.5, 2.0)));
        assert_eq!(parse_triplet::<usize>("1,2,3"), Ok((1, 2, 3)));
    }

    #[rstest(input, case("128"), case("1,2,3"), case("a,2"), case(""))]
    fn bad_pairs(input: &str) {
        assert!(parse_pair::<usize>(input).is_err());
    }

    #[test]
    fn progress_can_be_driven_without_a_subscriber() {
        let mut progress = timing::Progress::new();
        progress.start("work");
        progress.done();
        progress.done_with_message("more work");
    }
}
