//! 实验结果.

use crate::profile::Profile;
use std::io::{self, Write};

/// 将 `p` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.3}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Setting `{name}`:")?;
    writeln!(w, "{S4}Analyzed images: {}", p.get_analyzed())?;
    writeln!(w, "{S4}Failed images: {}", p.get_failed())?;
    writeln!(w, "{S4}Images with warnings: {}", p.get_warned())?;
    writeln!(w, "{S4}Insufficient lung samples: {}", p.get_insufficient())?;
    writeln!(
        w,
        "{S4}Average affected: {} %",
        f64_to_display(p.get_avg_percent())
    )?;
    writeln!(w, "{S4}Maximum affected: {:.3} %", p.get_max_percent())?;
    writeln!(w, "{S4}Total analysis time: {} us", p.get_analyze_time_us())?;
    writeln!(
        w,
        "{S4}Average analysis time: {} us",
        f64_to_display(p.get_avg_analyze_time_us())
    )?;
    writeln!(w, "{S4}Total machine time: {} us", p.get_real_time_us())?;
    let t = p.get_most_time_consuming().map(|d| d.as_micros() as f64);
    write!(w, "{S4}Most time-consuming image costs {} us", f64_to_display(t))?;
    Ok(())
}

/// 灵敏度扫描最终结果, 按设置顺序排列.
pub struct SweepResult {
    data: Vec<(String, Profile)>,
}

impl SweepResult {
    pub fn from_iter<I: IntoIterator<Item = (String, Profile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 打印运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);

        for (key, profile) in self.data.iter() {
            describe_into(key, profile, &mut buf).expect("Writing into memory buffer error");
            println!("{}", String::from_utf8_lossy(&buf));
            buf.clear();

            utils::sep();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_empty_profile() {
        let mut buf = vec![];
        describe_into("Z-score 0.9", &Profile::new().finish(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Setting `Z-score 0.9`:"));
        assert!(text.contains("Analyzed images: 0"));
        assert!(text.contains("Average affected: / %"));
        assert!(text.ends_with("costs / us"));
    }
}
