// the collection of utility functions mainly for bracket parsing and proceeding

/// true if every ')' closes an earlier '(' and nothing is left open
pub fn brackets_balanced(s: &str) -> bool {
    let mut depth: i64 = 0;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

// find position of the first occurrence of given char that is outside brackets only
pub fn find_char_positions_outside_brackets(s: &str, c: char) -> Option<usize> {
    let mut depth = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if ch == c && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

// code finds the position of the bracket closing the one opened at bracket_start
pub fn find_pair_to_this_bracket(input: &str, bracket_start: usize) -> Option<usize> {
    let mut stack = 0;
    for (i, c) in input.char_indices().skip_while(|(i, _)| *i < bracket_start) {
        if c == '(' {
            stack += 1;
        } else if c == ')' {
            stack -= 1;
            if stack == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// `(a + b)` -> `a + b`; `(a) + (b)` is returned untouched.
pub fn strip_outer_brackets(s: &str) -> Option<&str> {
    if s.starts_with('(') && find_pair_to_this_bracket(s, 0) == Some(s.len() - 1) {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    if num_values == 1 {
        return vec![start];
    }
    let mut values = Vec::with_capacity(num_values);
    let step = (end - start) / (num_values as f64 - 1.0);

    for i in 0..num_values {
        let value = start + (i as f64 * step);
        values.push(value);
    }
    // pin the right end, accumulated rounding must not move it
    if let Some(last) = values.last_mut() {
        *last = end;
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_brackets_balanced() {
        assert!(brackets_balanced("(x + (y))"));
        assert!(brackets_balanced("x"));
        assert!(!brackets_balanced("(x + y"));
        assert!(!brackets_balanced(")x("));
    }

    #[test]
    fn test_find_pair_to_this_bracket() {
        let s = "sin(x*(y+1))+2";
        assert_eq!(find_pair_to_this_bracket(s, 3), Some(11));
        assert_eq!(find_pair_to_this_bracket(s, 6), Some(10));
        assert_eq!(find_pair_to_this_bracket("(x", 0), None);
    }

    #[test]
    fn test_find_char_outside_brackets() {
        assert_eq!(find_char_positions_outside_brackets("(x^2)^3", '^'), Some(5));
        assert_eq!(find_char_positions_outside_brackets("(x^2)", '^'), None);
    }

    #[test]
    fn test_strip_outer_brackets() {
        assert_eq!(strip_outer_brackets("(x+1)"), Some("x+1"));
        assert_eq!(strip_outer_brackets("(x)+(1)"), None);
        assert_eq!(strip_outer_brackets("x"), None);
    }

    #[test]
    fn test_linspace() {
        let grid = linspace(-10.0, 10.0, 5);
        assert_eq!(grid.len(), 5);
        assert_relative_eq!(grid[0], -10.0);
        assert_relative_eq!(grid[2], 0.0);
        assert_eq!(grid[4], 10.0);

        let grid = linspace(0.0, 1.0, 400);
        assert_eq!(grid[399], 1.0);
        assert_relative_eq!(grid[1] - grid[0], 1.0 / 399.0, epsilon = 1e-15);
    }
}
