use std::time::Duration;

/// 推送间隔与超时的时间字符串解析
pub struct TimeParser;

impl TimeParser {
    /// 解析时间间隔字符串，支持：
    /// - 单个单位：500ms, 30s, 5m, 1h, 1d
    /// - 组合格式：1m30s, 1h15m
    /// - 纯数字：按毫秒处理（5000 = 5s）
    pub fn parse_duration(input: &str) -> Result<Duration, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err("时间间隔不能为空".to_string());
        }

        // 纯数字按毫秒处理
        if input.bytes().all(|b| b.is_ascii_digit()) {
            let ms: u64 = input
                .parse()
                .map_err(|_| format!("无效的数字: '{}'", input))?;
            return Self::non_zero(Duration::from_millis(ms));
        }

        let mut total = Duration::ZERO;
        let mut remaining = input;

        while !remaining.is_empty() {
            // 提取数字
            let digits = remaining
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(remaining.len());
            if digits == 0 {
                return Err(format!("无效的时间格式: '{}'", input));
            }
            let num: u64 = remaining[..digits]
                .parse()
                .map_err(|_| format!("无效的数字: '{}'", &remaining[..digits]))?;
            remaining = &remaining[digits..];

            // 提取单位
            let unit_len = remaining
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(remaining.len());
            if unit_len == 0 {
                return Err(format!("缺少时间单位，数字 '{}' 后应跟时间单位", num));
            }
            let unit = &remaining[..unit_len];
            remaining = &remaining[unit_len..];

            let segment = match unit.to_lowercase().as_str() {
                "ms" | "msec" | "millis" | "millisecond" | "milliseconds" => {
                    Duration::from_millis(num)
                }
                "s" | "sec" | "second" | "seconds" => Duration::from_secs(num),
                "m" | "min" | "minute" | "minutes" => Self::scaled(num, 60)?,
                "h" | "hour" | "hours" => Self::scaled(num, 3600)?,
                "d" | "day" | "days" => Self::scaled(num, 86_400)?,
                _ => return Err(format!("不支持的时间单位: '{}'", unit)),
            };

            total = total
                .checked_add(segment)
                .ok_or_else(|| format!("时间间隔超出范围: '{}'", input))?;
        }

        Self::non_zero(total)
    }

    /// 按配置中的写法格式化时间间隔，例如 `1m30s`
    pub fn format_duration(duration: Duration) -> String {
        let ms = duration.as_millis();
        if ms == 0 {
            return "0ms".to_string();
        }

        let mut out = String::new();
        let mut rest = ms;
        for (unit, size) in [("d", 86_400_000), ("h", 3_600_000), ("m", 60_000), ("s", 1000)] {
            if rest >= size {
                out.push_str(&format!("{}{}", rest / size, unit));
                rest %= size;
            }
        }
        if rest > 0 {
            out.push_str(&format!("{}ms", rest));
        }
        out
    }

    fn scaled(num: u64, secs: u64) -> Result<Duration, String> {
        num.checked_mul(secs)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("时间间隔超出范围: {}", num))
    }

    fn non_zero(duration: Duration) -> Result<Duration, String> {
        if duration.is_zero() {
            Err("时间间隔不能为零".to_string())
        } else {
            Ok(duration)
        }
    }
}
