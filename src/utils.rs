use {
    crate::error::{Error, Result},
    std::{
        fs::{self, File},
        io::{BufRead, BufReader},
        path::Path,
    },
};

/// Formats like C's `%.*e`: `-6.000000e+01`
pub fn sci(x: f64, precision: usize) -> String {
    let s = format!("{:.*e}", precision, x);
    match s.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent = exponent.parse::<i32>().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => s,
    }
}

/// Fortran logical literal
pub fn flag(b: bool) -> char {
    if b {
        't'
    } else {
        'f'
    }
}

pub fn create_dir_all<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Reads all lines of a solver output file, reporting absence as missing output
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(Error::MissingOutput(path.to_owned()));
    }

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn c_style_exponent() {
        assert_eq!(sci(-60.0, 6), "-6.000000e+01");
        assert_eq!(sci(0.0, 6), "0.000000e+00");
        assert_eq!(sci(5.8e-4, 3), "5.800e-04");
        assert_eq!(sci(1.0e5, 2), "1.00e+05");
    }

    #[test]
    fn missing_file() {
        match read_lines("does/not/exist.out") {
            Err(Error::MissingOutput(path)) => assert!(path.ends_with("exist.out")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
