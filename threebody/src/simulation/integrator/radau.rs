//! Gauss-Radau constants for the 15th-order-in-position (7-node) scheme.
//!
//! `H` holds the node spacings within one step (H[0] = 0 is the step start).
//! `R` feeds the divided-difference recurrence producing `g` from the node
//! accelerations, `C` converts changes in `g` into changes in `b`, and `D`
//! rebuilds `g` from `b` at the start of a step.
//!
//! `R` is stored triangularly: order `n` (1..=7) uses `R[n(n-1)/2 ..][..n]`.
//! `C` likewise: order `n` (2..=7) uses `C[(n-1)(n-2)/2 ..][..n-1]`.

#![allow(clippy::excessive_precision)]

pub(crate) const H: [f64; 8] = [
    0.0,
    0.0562625605369221464656521910,
    0.1802406917368923649875799428,
    0.3526247171131696373739077702,
    0.5471536263305553830014485577,
    0.7342101772154105410531523211,
    0.8853209468390957680903597629,
    0.9775206135612875018911745004,
];

pub(crate) const R: [f64; 28] = [
    0.0562625605369221464656522,
    0.1802406917368923649875799,
    0.1239781311999702185219278,
    0.3526247171131696373739078,
    0.2963621565762474909082556,
    0.1723840253762772723863278,
    0.5471536263305553830014486,
    0.4908910657936332365357964,
    0.3669129345936630180138686,
    0.1945289092173857456275408,
    0.7342101772154105410531523,
    0.6779476166784883945875001,
    0.5539694854785181760655724,
    0.3815854601022409036792446,
    0.1870565508848551580517038,
    0.8853209468390957680903598,
    0.8290583863021736216247076,
    0.7050802551022034031027798,
    0.5326962297259261307164520,
    0.3381673205085403850889112,
    0.1511107696236852270372074,
    0.9775206135612875018911745,
    0.9212580530243653554255223,
    0.7972799218243951369035946,
    0.6248958964481178645172667,
    0.4303669872307321188897259,
    0.2433104363458769608380222,
    0.0921996667221917338008147,
];

pub(crate) const C: [f64; 21] = [
    -0.0562625605369221464656522,
    0.0101408028300636299864818,
    -0.2365032522738145114532321,
    -0.0035758977292516175949345,
    0.0935376952594620658957485,
    -0.5891279693869841488271399,
    0.0019565654099472210769006,
    -0.0547553868890686864408084,
    0.4158812000823068616886219,
    -1.1362815957175395318285885,
    -0.0014365302363708915610919,
    0.0421585277212687082291130,
    -0.3600995965020568162530901,
    1.2501507118406910366792415,
    -1.8704917729329500728817408,
    0.0012717903090268677658020,
    -0.0387603579159067708505249,
    0.3609622434528459872559689,
    -1.4668842084004269779203515,
    2.9061362593084293206895457,
    -2.7558127197720458409721005,
];

pub(crate) const D: [f64; 21] = [
    0.0562625605369221464656522,
    0.0031654757181708292499905,
    0.2365032522738145114532321,
    0.0001780977692217433881125,
    0.0457929855060279188954539,
    0.5891279693869841488271399,
    0.0000100202365223291272096,
    0.0084318571535257015445000,
    0.2535340690545692665214616,
    1.1362815957175395318285885,
    0.0000005637641639318207610,
    0.0015297840025004658189490,
    0.0978342365324440053653648,
    0.8752546646840910912297246,
    1.8704917729329500728817408,
    0.0000000317188154017613665,
    0.0002762930909826476593130,
    0.0360285539837364596003871,
    0.5767330002770787313544596,
    2.2485887607691598182153473,
    2.7558127197720458409721005,
];

/// Offset of order `n` (1..=7) in `R`
pub(crate) const fn r_offset(n: usize) -> usize {
    n * (n - 1) / 2
}

/// Offset of order `n` (2..=7) in `C`
pub(crate) const fn c_offset(n: usize) -> usize {
    (n - 1) * (n - 2) / 2
}
