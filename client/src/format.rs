/// Population with `.` thousands grouping, as written in pt-BR (`1.037.775`).
pub fn format_population(population: u64) -> String {
    let mut out = String::with_capacity(16);
    write_grouped(&mut out, population, '.');
    out
}

pub fn write_grouped(buf: &mut String, value: u64, separator: char) {
    buf.clear();
    let digits = value.to_string();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            buf.push(separator);
        }
        buf.push(ch);
    }
}
